// Audit records are formatted from inside arbitrary libc calls of the
// untrusted program (possibly from within malloc() itself): we cannot
// allocate dynamic memory. Any record needs to fit into a stack buffer,
// the rest will be truncated.
pub(crate) struct StackBuffer<const SIZE: usize> {
    buf: [u8; SIZE],
    used_bytes: usize,
}

impl<const SIZE: usize> StackBuffer<SIZE> {
    pub(crate) fn new() -> Self {
        Self {
            buf: [0u8; SIZE],
            used_bytes: 0,
        }
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.buf[0..self.used_bytes]
    }

    /// Terminates the record with a newline, even if it had to be truncated.
    pub(crate) fn end_line(&mut self) {
        if SIZE == 0 {
            return;
        }
        let pos = usize::min(self.used_bytes, SIZE - 1);
        self.buf[pos] = b'\n';
        self.used_bytes = pos + 1;
    }
}

impl<const SIZE: usize> core::fmt::Write for StackBuffer<SIZE> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        let capacity = SIZE.saturating_sub(1); // always keep room for a newline
        if self.used_bytes >= capacity {
            return Ok(());
        }
        for (i, &b) in self.buf[self.used_bytes..capacity] // truncate the rest, don't panic!()
            .iter_mut()
            .zip(s.as_bytes().iter())
        {
            *i = b;
        }
        self.used_bytes = usize::min(capacity, self.used_bytes + s.as_bytes().len());
        Ok(())
    }
}
