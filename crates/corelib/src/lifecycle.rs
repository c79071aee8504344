//! "Create before use, destroy once" bookkeeping for renderer objects.

use crate::error::{CausticError, CausticResult};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Creatable {
    created: bool,
}

impl Creatable {
    pub const fn new() -> Self {
        Self { created: false }
    }

    #[inline]
    pub fn is_created(&self) -> bool {
        self.created
    }

    pub fn create(&mut self, what: &str) -> CausticResult<()> {
        self.check_not_created(what)?;
        self.created = true;
        Ok(())
    }

    pub fn destroy(&mut self, what: &str) -> CausticResult<()> {
        self.check_created(what)?;
        self.created = false;
        Ok(())
    }

    pub fn check_not_created(&self, what: &str) -> CausticResult<()> {
        if self.created {
            Err(CausticError::IllegalState(format!("{what} has already been created")))
        } else {
            Ok(())
        }
    }

    pub fn check_created(&self, what: &str) -> CausticResult<()> {
        if self.created {
            Ok(())
        } else {
            Err(CausticError::IllegalState(format!("{what} has not been created yet")))
        }
    }
}
