use std::path::Path;

use corroics::IcsReader;

fn main() {
    let path = match std::env::args().nth(1) {
        Some(path) => path,
        None => {
            eprintln!("usage: ics_info <file.ics>");
            std::process::exit(2);
        },
    };

    match IcsReader::open(Path::new(&path)) {
        Ok(reader) => {
            let layout = reader.layout();
            println!("Data type is {:?}", layout.data_type);
            println!(
                "{} dimensions, fastest axis first: {:?}",
                layout.ndim(),
                layout.dimensions
            );
            println!("{} bytes of sample data", reader.data_size());
        },
        Err(err) => {
            eprintln!("Error: {}", err);
            std::process::exit(1);
        },
    }
}
