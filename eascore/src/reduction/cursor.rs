/// Forward cursor over a fallible record stream with one record of lookahead.
///
/// Once the underlying stream reports its end the cursor stays exhausted and
/// never polls the stream again.
pub struct StreamCursor<I, T> {
    inner: I,
    pending: Option<T>,
    exhausted: bool,
    consumed: usize,
}

impl<I, T, E> StreamCursor<I, T>
where
    I: Iterator<Item = Result<T, E>>,
{
    pub fn new(inner: I) -> Self {
        StreamCursor { inner, pending: None, exhausted: false, consumed: 0 }
    }

    /// The next record without consuming it, `None` once the stream is done.
    pub fn peek(&mut self) -> Result<Option<&T>, E> {
        if self.pending.is_none() && !self.exhausted {
            match self.inner.next() {
                Some(record) => self.pending = Some(record?),
                None => self.exhausted = true,
            }
        }
        Ok(self.pending.as_ref())
    }

    pub fn advance(&mut self) -> Result<Option<T>, E> {
        self.peek()?;
        let record = self.pending.take();
        if record.is_some() {
            self.consumed += 1;
        }
        Ok(record)
    }

    /// Number of records handed out by `advance`.
    pub fn consumed(&self) -> usize {
        self.consumed
    }
}
