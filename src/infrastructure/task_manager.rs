use tokio::task::JoinHandle;

/// Manages background tasks with proper lifecycle handling
#[derive(Default)]
pub struct TaskManager {
    handles: Vec<JoinHandle<()>>,
}

impl TaskManager {
    /// Create a new empty task manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a task and track it
    pub fn spawn<F>(&mut self, future: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(future);
        self.handles.push(handle);
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Wait for every tracked task to run to completion
    pub async fn join(self) {
        for handle in self.handles {
            if let Err(e) = handle.await
                && e.is_panic()
            {
                tracing::error!("Background task panicked: {}", e);
            }
        }
    }
}
