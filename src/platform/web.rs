//! Browser executor: `spawn_local` for futures, `setTimeout` for timers

use std::time::Duration;

use futures::future::LocalBoxFuture;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use super::{Executor, ScheduledTask};

#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserExecutor;

impl Executor for BrowserExecutor {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(task);
    }

    fn schedule(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> ScheduledTask {
        let Some(window) = web_sys::window() else {
            log::error!("No window - timer not scheduled");
            return ScheduledTask::detached();
        };

        let closure = Closure::once(move || callback());
        let millis = delay.as_millis().min(i32::MAX as u128) as i32;
        match window.set_timeout_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            millis,
        ) {
            Ok(handle) => ScheduledTask::new(move || {
                window.clear_timeout_with_handle(handle);
                // The JS side defers freeing until any running invocation returns
                drop(closure);
            }),
            Err(e) => {
                log::error!("setTimeout failed: {:?}", e);
                ScheduledTask::detached()
            }
        }
    }
}
