use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Cooperative quit request.
///
/// Cloned into whoever may ask the console to stop (the script `quit`
/// callable, a ctrl-c hook) and checked by the console after every line.
/// Setting it more than once is harmless.
#[derive(Debug, Clone, Default)]
pub struct QuitSignal {
    flag: Arc<AtomicBool>,
}

impl QuitSignal {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_set(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    #[inline]
    pub fn set(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn install_ctrlc(&self) -> Result<(), ctrlc::Error> {
        let flag = self.flag.clone();
        ctrlc::set_handler(move || {
            flag.store(true, Ordering::Release);
        })
    }
}
