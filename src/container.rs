//! The container handles: everything that touches an `.ics`
//! file on disk. [`IcsReader`] opens a file and hands out its
//! layout and sample bytes; [`IcsWriter`] collects a layout, a
//! borrowed sample buffer, and history entries, then writes the
//! whole file when it is closed.
//!
//! A handle belongs to exactly one decode or encode call. Both
//! handles release their file on every exit path: dropping a
//! reader closes it, and dropping a writer that was never
//! successfully closed also removes the partially created path,
//! so a failed write leaves nothing behind.

pub mod header;

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use crate::dtype::{IcsDataType, ICS_MAX_DIM};
use crate::utils::CorroicsError;

use header::IcsVersion;

/// The dimensional layout of a container: a data-type tag plus
/// the dimension extents, *fastest-varying axis first* (the ICS
/// convention -- the reverse of an array shape).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IcsLayout {
    pub data_type : IcsDataType,
    pub dimensions : Vec<usize>,
}

impl IcsLayout {
    pub fn new(data_type : IcsDataType, dimensions : Vec<usize>) -> Self {
        IcsLayout { data_type, dimensions }
    }

    /// Number of dimensions.
    pub fn ndim(&self) -> usize {
        self.dimensions.len()
    }

    /// Total size of the sample data in bytes:
    /// `sample size × product of the dimension extents`.
    pub fn data_size(&self) -> usize {
        self.data_type.size() * self.dimensions.iter().product::<usize>()
    }

    /// A layout must have between 1 and [`ICS_MAX_DIM`] dimensions,
    /// every one of them at least 1.
    pub (crate) fn validate(&self) -> Result<(), String> {
        let ndim = self.ndim();
        if ndim == 0 {
            return Err("layout has no dimensions".to_string());
        }
        if ndim > ICS_MAX_DIM {
            return Err(format!(
                "layout has {} dimensions, the limit is {}",
                ndim, ICS_MAX_DIM
            ));
        }
        if self.dimensions.iter().any(|d| *d == 0) {
            return Err("every dimension must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Reads the sample segment into `buf` and, when the file's
/// byte order does not match the host's, reverses each sample
/// in place.
#[binrw::parser(reader)]
fn load_samples(
        buf : &mut [u8],
        sample_size : usize,
        swap : bool,
    ) -> binrw::BinResult<()> {

    reader.read_exact(buf)?;
    if swap && sample_size > 1 {
        buf.chunks_exact_mut(sample_size).for_each(|sample| sample.reverse());
    }
    Ok(())
}

/// An open ICS container, read side. Owns the underlying file;
/// after `open` the reader sits on the first sample byte (of
/// the `.ics` file itself for version 2.0, of the companion
/// `.ids` file for version 1.0).
///
/// ## Example
///
/// ```rust, ignore
/// let mut file = IcsReader::open("image.ics".as_ref())?;
/// let mut bytes = vec![0u8; file.data_size()];
/// file.read_data(&mut bytes)?;
/// file.close()?;
/// ```
pub struct IcsReader {
    layout : IcsLayout,
    byte_swap : bool,
    reader : BufReader<File>,
}

impl IcsReader {

    /// Opens `path` and parses its header. Any failure here --
    /// a missing file, a header that will not parse, a feature
    /// this crate rejects -- is `OpenFailed`.
    ///
    /// ## Arguments
    ///
    /// * `path` - The `.ics` file to open
    pub fn open(path : &Path) -> Result<Self, CorroicsError> {
        let file = File::open(path).map_err(
            |err| CorroicsError::OpenFailed(
                format!("{}: {}", path.display(), err)
            )
        )?;
        let mut reader = BufReader::new(file);
        let parsed = header::parse_header(&mut reader)?;

        // A version 1.0 header keeps its samples in a sibling
        // `.ids` file; version 2.0 samples follow the header.
        let reader = match parsed.version {
            IcsVersion::V2 => reader,
            IcsVersion::V1 => {
                let ids_path = path.with_extension("ids");
                let ids = File::open(&ids_path).map_err(
                    |err| CorroicsError::OpenFailed(
                        format!("{}: {}", ids_path.display(), err)
                    )
                )?;
                BufReader::new(ids)
            },
        };

        Ok(IcsReader {
            layout : parsed.layout,
            byte_swap : parsed.byte_swap,
            reader,
        })
    }

    /// The layout the header declared.
    pub fn layout(&self) -> &IcsLayout {
        &self.layout
    }

    /// Total size of the sample data in bytes.
    pub fn data_size(&self) -> usize {
        self.layout.data_size()
    }

    /// Copies exactly `buf.len()` sample bytes into `buf`,
    /// normalized to host byte order. Fails with `ReadFailed`
    /// when the file cannot supply that many bytes.
    pub fn read_data(&mut self, buf : &mut [u8]) -> Result<(), CorroicsError> {
        load_samples(
            &mut self.reader,
            binrw::Endian::Little,
            (buf, self.layout.data_type.size(), self.byte_swap),
        ).map_err(|err| CorroicsError::ReadFailed(err.to_string()))
    }

    /// Closes the container, verifying that the sample segment
    /// ends where the layout says it should. Bytes left over
    /// after the declared sample data mean a corrupt trailer,
    /// surfaced as `CloseFailed`.
    pub fn close(mut self) -> Result<(), CorroicsError> {
        let mut probe = [0u8; 1];
        match self.reader.read(&mut probe) {
            Ok(0) => Ok(()),
            Ok(_) => Err(CorroicsError::CloseFailed(
                "trailing bytes after the sample data".to_string()
            )),
            Err(err) => Err(CorroicsError::CloseFailed(err.to_string())),
        }
    }
}

/// An open ICS container, write side. Created with overwrite
/// semantics in version 2.0 (single file, extended header) mode;
/// `set_layout`, `set_data`, and `add_history` only stage their
/// arguments -- the actual write happens in [`close`](Self::close).
///
/// The sample buffer is borrowed, not copied: the caller keeps
/// ownership, and the borrow pins the buffer alive until the
/// writer is gone.
pub struct IcsWriter<'data> {
    path : PathBuf,
    file : Option<File>,
    layout : Option<IcsLayout>,
    data : Option<&'data [u8]>,
    history : Vec<(String, String)>,
    finalized : bool,
}

impl<'data> IcsWriter<'data> {

    /// Creates (or truncates) `path`. Failure is `OpenFailed`.
    pub fn create(path : &Path) -> Result<Self, CorroicsError> {
        let file = File::create(path).map_err(
            |err| CorroicsError::OpenFailed(
                format!("{}: {}", path.display(), err)
            )
        )?;
        Ok(IcsWriter {
            path : path.to_path_buf(),
            file : Some(file),
            layout : None,
            data : None,
            history : Vec::new(),
            finalized : false,
        })
    }

    /// Stages the layout. `dimensions` is in container order,
    /// fastest-varying axis first. Validated at close.
    pub fn set_layout(&mut self, data_type : IcsDataType, dimensions : &[usize]) {
        self.layout = Some(IcsLayout::new(data_type, dimensions.to_vec()));
    }

    /// Attaches the sample buffer the container will write from.
    pub fn set_data(&mut self, data : &'data [u8]) {
        self.data = Some(data);
    }

    /// Appends a history entry to the header's provenance record.
    pub fn add_history(&mut self, key : &str, value : &str) {
        self.history.push((key.to_string(), value.to_string()));
    }

    /// Performs the actual write -- header, then sample bytes --
    /// and flushes. Any failure is `CloseFailed`, and the partial
    /// file is removed so a failed encode leaves no debris.
    pub fn close(mut self) -> Result<(), CorroicsError> {
        let result = self.write_out();
        self.finalized = true;
        if result.is_err() {
            // Drop the handle before unlinking.
            self.file.take();
            let _ = std::fs::remove_file(&self.path);
        }
        result
    }

    fn write_out(&mut self) -> Result<(), CorroicsError> {
        let layout = self.layout.take().ok_or_else(|| {
            CorroicsError::CloseFailed("no layout was set".to_string())
        })?;
        layout.validate().map_err(CorroicsError::CloseFailed)?;

        let data = self.data.take().ok_or_else(|| {
            CorroicsError::CloseFailed("no data was attached".to_string())
        })?;
        if data.len() != layout.data_size() {
            return Err(CorroicsError::CloseFailed(format!(
                "data is {} bytes but the layout calls for {}",
                data.len(),
                layout.data_size()
            )));
        }

        let file = self.file.take().ok_or_else(|| {
            CorroicsError::CloseFailed("file handle already gone".to_string())
        })?;

        let stem = self.path.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut writer = BufWriter::new(file);
        header::write_header(&mut writer, &layout, &self.history, &stem)
            .map_err(|err| CorroicsError::CloseFailed(err.to_string()))?;
        writer.write_all(data)
            .map_err(|err| CorroicsError::CloseFailed(err.to_string()))?;

        let file = writer.into_inner()
            .map_err(|err| CorroicsError::CloseFailed(err.to_string()))?;
        file.sync_all()
            .map_err(|err| CorroicsError::CloseFailed(err.to_string()))?;
        Ok(())
    }
}

impl Drop for IcsWriter<'_> {
    fn drop(&mut self) {
        if !self.finalized {
            self.file.take();
            let _ = std::fs::remove_file(&self.path);
        }
    }
}
