use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::sync::{Condvar, Mutex};

use anyhow::Result;

mod ctrlc;

pub fn init() -> Result<GracefulShutdown> {
    let shutdown = GracefulShutdown::new();
    ctrlc::init(shutdown.clone())?;
    Ok(shutdown)
}

/// Coordinates the accept loop and its workers during shutdown: a
/// Ctrl-C signal flips `shutting_down`, the accept loop stops handing
/// out new connections, and `wait_inflight_zero` blocks until every
/// `InflightGuard` issued so far has been dropped.
#[derive(Clone, Debug)]
pub struct GracefulShutdown {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    shutting_down: AtomicBool,
    inflight: Mutex<u64>,
    cv: Condvar,
}

#[derive(Debug)]
pub struct InflightGuard {
    inner: Arc<Inner>,
}

impl Drop for InflightGuard {
    fn drop(&mut self) {
        let mut inflight = self.inner.inflight.lock().unwrap();
        *inflight -= 1;
        if *inflight == 0 {
            self.inner.cv.notify_all();
        }
    }
}

impl GracefulShutdown {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                shutting_down: AtomicBool::new(false),
                inflight: Mutex::new(0),
                cv: Condvar::new(),
            }),
        }
    }

    pub fn initiate(&self) {
        if self.inner.shutting_down.swap(true, Ordering::Release) {
            return;
        }
        self.inner.cv.notify_all();
    }

    pub fn is_shutting_down(&self) -> bool {
        self.inner.shutting_down.load(Ordering::Acquire)
    }

    pub fn inflight_guard(&self) -> InflightGuard {
        *self.inner.inflight.lock().unwrap() += 1;
        InflightGuard {
            inner: self.inner.clone(),
        }
    }

    pub fn wait_inflight_zero(&self) {
        let mut inflight = self.inner.inflight.lock().unwrap();
        while *inflight != 0 {
            inflight = self.inner.cv.wait(inflight).unwrap();
        }
    }
}

impl Default for GracefulShutdown {
    fn default() -> Self {
        Self::new()
    }
}
