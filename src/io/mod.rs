//! Destinations for solver output relayed from an engine.
//!
//! COSMO prints its progress table when `verbose` is set.  The Julia engine
//! captures those lines from the runtime and writes them to a print target,
//! which by default is the host process stdout.

use std::fs::File;
use std::io::{Error, ErrorKind, Result, Write};

// inside a python interpreter, output has to go through sys.stdout
// or it is lost in notebooks
cfg_if::cfg_if! {
    if #[cfg(feature = "python")] {
        pub(crate) use crate::python::io::{stdout, Stdout};
    } else {
        pub(crate) use std::io::{stdout, Stdout};
    }
}

/// Where relayed solver output is written
pub(crate) enum PrintTarget {
    Stdout(Stdout),
    File(File),
    Buffer(Vec<u8>),
    Stream(Box<dyn Write + Send + Sync>),
    /// output is discarded
    Sink,
}

impl std::fmt::Debug for PrintTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrintTarget::Stdout(_) => write!(f, "PrintTarget::Stdout"),
            PrintTarget::File(_) => write!(f, "PrintTarget::File"),
            PrintTarget::Buffer(buffer) => write!(f, "PrintTarget::Buffer({} bytes)", buffer.len()),
            PrintTarget::Stream(_) => write!(f, "PrintTarget::Stream"),
            PrintTarget::Sink => write!(f, "PrintTarget::Sink"),
        }
    }
}

impl Default for PrintTarget {
    fn default() -> Self {
        PrintTarget::Stdout(self::stdout())
    }
}

impl Write for PrintTarget {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        match self {
            PrintTarget::Stdout(stdout) => stdout.write(buf),
            PrintTarget::File(file) => file.write(buf),
            PrintTarget::Buffer(buffer) => {
                buffer.extend_from_slice(buf);
                Ok(buf.len())
            }
            PrintTarget::Stream(stream) => stream.write(buf),
            PrintTarget::Sink => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> Result<()> {
        match self {
            PrintTarget::Stdout(stdout) => stdout.flush(),
            PrintTarget::File(file) => file.flush(),
            PrintTarget::Stream(stream) => stream.flush(),
            PrintTarget::Buffer(_) | PrintTarget::Sink => Ok(()),
        }
    }
}

/// Implemented by engines whose solver output can be redirected
pub trait ConfigurablePrintTarget {
    /// relay output to stdout
    fn print_to_stdout(&mut self);
    /// relay output to a file
    fn print_to_file(&mut self, file: File);
    /// relay output to a stream
    fn print_to_stream(&mut self, stream: Box<dyn Write + Send + Sync>);
    /// collect output in an internal buffer
    fn print_to_buffer(&mut self);
    /// discard output
    fn print_to_sink(&mut self);
    /// take the contents of the internal buffer, leaving it empty
    fn get_print_buffer(&mut self) -> Result<String>;
}

impl ConfigurablePrintTarget for PrintTarget {
    fn print_to_stdout(&mut self) {
        *self = PrintTarget::Stdout(self::stdout());
    }

    fn print_to_file(&mut self, file: File) {
        *self = PrintTarget::File(file);
    }

    fn print_to_stream(&mut self, stream: Box<dyn Write + Send + Sync>) {
        *self = PrintTarget::Stream(stream);
    }

    fn print_to_buffer(&mut self) {
        *self = PrintTarget::Buffer(Vec::new());
    }

    fn print_to_sink(&mut self) {
        *self = PrintTarget::Sink;
    }

    fn get_print_buffer(&mut self) -> Result<String> {
        match self {
            PrintTarget::Buffer(buffer) => {
                let contents = String::from_utf8_lossy(buffer).into_owned();
                buffer.clear();
                Ok(contents)
            }
            _ => Err(Error::new(
                ErrorKind::Other,
                "Print buffering is not configured.",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_target() {
        let mut target = PrintTarget::default();
        assert!(target.get_print_buffer().is_err());

        target.print_to_buffer();
        writeln!(target, "iter 1").unwrap();
        write!(target, "done").unwrap();
        assert_eq!(target.get_print_buffer().unwrap(), "iter 1\ndone");
        assert_eq!(target.get_print_buffer().unwrap(), "");
    }

    #[test]
    fn test_sink_target() {
        let mut target = PrintTarget::Sink;
        assert_eq!(target.write(b"ignored").unwrap(), 7);
        assert!(target.flush().is_ok());
        assert!(target.get_print_buffer().is_err());
    }
}
