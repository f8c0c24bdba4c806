// Provides a Writer that sends solver output to Python's sys.stdout,
// so that it appears in notebooks and other redirected sessions

use pyo3::ffi::{PyErr_Clear, PyObject_CallMethod, PySys_GetObject, PySys_WriteStdout, Py_DecRef};
use std::ffi::CString;
use std::io;
use std::os::raw::c_char;

// PySys_WriteStdout truncates anything longer than 1000 bytes
const MAX_CHUNK: usize = 900;

pub(crate) struct PythonStdout {}

pub(crate) type Stdout = PythonStdout;

pub(crate) fn stdout() -> PythonStdout {
    PythonStdout {}
}

impl io::Write for PythonStdout {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for chunk in buf.chunks(MAX_CHUNK) {
            let text: Vec<u8> = chunk.iter().copied().filter(|&c| c != 0).collect();
            let cstr = CString::new(text).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            // the text goes through a "%s" format so that '%' is printed as is
            unsafe {
                PySys_WriteStdout(b"%s\0".as_ptr() as *const c_char, cstr.as_ptr());
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // sys.stdout.flush()
        unsafe {
            let stdout_obj = PySys_GetObject(b"stdout\0".as_ptr() as *const c_char);
            if stdout_obj.is_null() {
                return Ok(());
            }
            let result = PyObject_CallMethod(
                stdout_obj,
                b"flush\0".as_ptr() as *const c_char,
                std::ptr::null(),
            );
            if result.is_null() {
                PyErr_Clear();
            } else {
                Py_DecRef(result);
            }
        }
        Ok(())
    }
}
