// Copyright (c) 2022-2023 The MobileCoin Foundation

use crate::ApduError;

/// Cursor over a length-prefixed response buffer
pub(crate) struct Reader<'a> {
    buff: &'a [u8],
    index: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(buff: &'a [u8]) -> Self {
        Self { buff, index: 0 }
    }

    pub(crate) fn byte(&mut self) -> Result<u8, ApduError> {
        Ok(self.take(1)?[0])
    }

    pub(crate) fn take(&mut self, n: usize) -> Result<&'a [u8], ApduError> {
        let end = self.index + n;
        if end > self.buff.len() {
            return Err(ApduError::InvalidLength {
                expected: end,
                actual: self.buff.len(),
            });
        }

        let v = &self.buff[self.index..end];
        self.index = end;
        Ok(v)
    }

    pub(crate) fn rest(&mut self) -> &'a [u8] {
        let v = &self.buff[self.index..];
        self.index = self.buff.len();
        v
    }
}
