use tokio::sync::Mutex as AsyncMutex;

/// Process-wide lock for tests that mutate environment variables.
/// Use `.blocking_lock()` in sync tests and `.lock().await` in async tests.
pub static ENV_LOCK: AsyncMutex<()> = AsyncMutex::const_new(());

/// Clears the listed variables on creation and again on drop, so a failing
/// assertion does not leak settings into the next test. Hold `ENV_LOCK` while
/// this is alive.
pub struct ScopedEnv {
    keys: Vec<&'static str>,
}

impl ScopedEnv {
    pub fn cleared(keys: &[&'static str]) -> Self {
        for key in keys {
            std::env::remove_var(key);
        }
        Self {
            keys: keys.to_vec(),
        }
    }

    pub fn set(&self, key: &'static str, value: &str) {
        debug_assert!(self.keys.contains(&key), "{key} is not scoped");
        std::env::set_var(key, value);
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for key in &self.keys {
            std::env::remove_var(key);
        }
    }
}
