/// Accumulates errors so that every problem of a native function is reported
/// at once.
#[derive(Debug, Default)]
pub struct Dump {
    errors: Option<syn::Error>,
}

impl Dump {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, error: syn::Error) {
        match self.errors.as_mut() {
            Some(stored) => stored.combine(error),
            None => self.errors = Some(error),
        }
    }

    /// Appends a last error and returns everything appended.
    pub fn fail(self, error: syn::Error) -> syn::Error {
        match self.errors {
            Some(mut stored) => {
                stored.combine(error);
                stored
            },
            None => error,
        }
    }

    /// Fails with every appended error, if any.
    pub fn check(self) -> syn::Result<()> {
        match self.errors {
            Some(errors) => Err(errors),
            None => Ok(()),
        }
    }
}
