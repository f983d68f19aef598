/// Bounded-concurrency batch execution
///
/// One task per distinct item, admitted through a semaphore. A task that
/// errors or panics becomes a miss for its own item; every other item still
/// gets its result. Tasks live in a `JoinSet`, so dropping the batch aborts
/// every item that has not finished.
use crate::errors::ResolverResult;
use crate::logger::{self, LogTag};
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

pub struct BatchRunner {
    concurrency: usize,
}

impl BatchRunner {
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub async fn run<F, Fut>(
        &self,
        label: &str,
        items: Vec<String>,
        op: F,
    ) -> HashMap<String, Option<String>>
    where
        F: Fn(String) -> Fut + Clone + Send + 'static,
        Fut: Future<Output = ResolverResult<Option<String>>> + Send + 'static,
    {
        let mut seen = HashSet::new();
        let unique: Vec<String> = items
            .into_iter()
            .filter(|item| seen.insert(item.clone()))
            .collect();

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();

        for item in &unique {
            let sem = semaphore.clone();
            let op = op.clone();
            let item = item.clone();

            tasks.spawn(async move {
                let Ok(_permit) = sem.acquire_owned().await else {
                    return (item, None);
                };
                let value = match op(item.clone()).await {
                    Ok(value) => value,
                    Err(e) => {
                        logger::debug(
                            LogTag::Batch,
                            &format!("Batch item {} failed: {}", item, e),
                        );
                        None
                    }
                };
                (item, value)
            });
        }

        // a panicked task leaves its item at None
        let mut output: HashMap<String, Option<String>> =
            unique.into_iter().map(|item| (item, None)).collect();
        let mut resolved = 0;

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((item, value)) => {
                    if value.is_some() {
                        resolved += 1;
                    }
                    output.insert(item, value);
                }
                Err(e) => {
                    logger::warning(LogTag::Batch, &format!("Batch task aborted: {}", e));
                }
            }
        }

        logger::info(
            LogTag::Batch,
            &format!(
                "{}: {}/{} items resolved (concurrency {})",
                label,
                resolved,
                output.len(),
                self.concurrency
            ),
        );

        output
    }
}
