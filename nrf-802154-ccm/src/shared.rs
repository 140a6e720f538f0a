use core::cell::RefCell;

use embassy_sync::blocking_mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use crate::hal::{CcmPeripheral, IrqLine};
use crate::transform::{AcceleratorState, TransformEngine};
use crate::variant::Variant;

type Slot<'d, V, P, I> = Option<TransformEngine<'d, V, P, I>>;

/// A [`TransformEngine`] shared between the MAC layer and the accelerator interrupt.
///
/// Every access runs in a critical section. Tasks can await completion with
/// [`wait_secured`](Self::wait_secured).
///
/// ```rust,ignore
/// static ENGINE: SharedEngine<'static, Autonomous, Ccm, CcmIrq> = SharedEngine::new();
///
/// #[interrupt]
/// fn CCM() {
///     ENGINE.on_interrupt();
/// }
/// ```
pub struct SharedEngine<'d, V: Variant, P: CcmPeripheral, I: IrqLine> {
    engine: blocking_mutex::Mutex<CriticalSectionRawMutex, RefCell<Slot<'d, V, P, I>>>,
    signal: Signal<CriticalSectionRawMutex, ()>,
}

impl<'d, V: Variant, P: CcmPeripheral, I: IrqLine> SharedEngine<'d, V, P, I> {
    /// Create an empty slot.
    pub const fn new() -> Self {
        Self {
            engine: blocking_mutex::Mutex::new(RefCell::new(None)),
            signal: Signal::new(),
        }
    }

    /// Put `engine` in the slot, returning the one it replaces.
    pub fn install(&self, engine: TransformEngine<'d, V, P, I>) -> Option<TransformEngine<'d, V, P, I>> {
        self.update(|slot| slot.replace(engine))
    }

    /// Empty the slot.
    pub fn take(&self) -> Option<TransformEngine<'d, V, P, I>> {
        self.update(Option::take)
    }

    /// Run `f` on the installed engine, waking tasks blocked in [`wait_secured`](Self::wait_secured).
    ///
    /// Returns `None` if no engine is installed.
    pub fn with<F, R>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut TransformEngine<'d, V, P, I>) -> R,
    {
        self.update(|slot| slot.as_mut().map(f))
    }

    /// Accelerator interrupt handler.
    pub fn on_interrupt(&self) {
        if self.with(|engine| engine.on_interrupt()).is_none() {
            trace!("ccm: interrupt without an engine");
        }
    }

    /// Wait until the current transform is over.
    ///
    /// Returns `true` once the work buffer is secured, `false` if nothing is in flight, for instance because
    /// the transform was aborted, the accelerator faulted or the engine was taken out.
    pub async fn wait_secured(&self) -> bool {
        self.wait(|slot| match slot {
            Some(engine) if engine.work_buffer().is_secured() => Some(true),
            Some(engine)
                if matches!(
                    engine.state(),
                    AcceleratorState::Configuring | AcceleratorState::Armed | AcceleratorState::Running
                ) =>
            {
                None
            }
            _ => Some(false),
        })
        .await
    }

    async fn wait<F, R>(&self, mut f: F) -> R
    where
        F: FnMut(&mut Slot<'d, V, P, I>) -> Option<R>,
    {
        loop {
            if let Some(result) = self.engine.lock(|slot| f(&mut slot.borrow_mut())) {
                break result;
            }

            self.signal.wait().await;
        }
    }

    fn update<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Slot<'d, V, P, I>) -> R,
    {
        self.engine.lock(|slot| {
            let result = f(&mut slot.borrow_mut());

            self.signal.signal(());
            result
        })
    }
}

impl<V: Variant, P: CcmPeripheral, I: IrqLine> Default for SharedEngine<'_, V, P, I> {
    fn default() -> Self {
        Self::new()
    }
}
