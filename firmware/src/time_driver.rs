//! SysTick-based embassy time driver with a single alarm

use core::cell::Cell;
use critical_section::Mutex;
use embassy_time_driver::{AlarmHandle, Driver};
use portable_atomic::{AtomicBool, AtomicU64, Ordering};

type AlarmCallback = (fn(*mut ()), usize);

/// Time driver counting SysTick interrupts
pub struct SysTickTimeDriver {
    ticks: AtomicU64,
    alarm_taken: AtomicBool,
    alarm_at: Mutex<Cell<u64>>,
    callback: Mutex<Cell<Option<AlarmCallback>>>,
}

impl SysTickTimeDriver {
    const fn new() -> Self {
        Self {
            ticks: AtomicU64::new(0),
            alarm_taken: AtomicBool::new(false),
            alarm_at: Mutex::new(Cell::new(u64::MAX)),
            callback: Mutex::new(Cell::new(None)),
        }
    }

    /// Advance time by one tick and fire the alarm if it is due
    /// (called from the SysTick interrupt)
    fn tick(&self) {
        let now = self.ticks.fetch_add(1, Ordering::Relaxed) + 1;

        let due = critical_section::with(|cs| {
            let alarm_at = self.alarm_at.borrow(cs);
            if now >= alarm_at.get() {
                alarm_at.set(u64::MAX);
                self.callback.borrow(cs).get()
            } else {
                None
            }
        });

        if let Some((callback, ctx)) = due {
            callback(ctx as *mut ());
        }
    }
}

impl Driver for SysTickTimeDriver {
    fn now(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    unsafe fn allocate_alarm(&self) -> Option<AlarmHandle> {
        if self.alarm_taken.swap(true, Ordering::AcqRel) {
            None
        } else {
            Some(AlarmHandle::new(0))
        }
    }

    fn set_alarm_callback(&self, _alarm: AlarmHandle, callback: fn(*mut ()), ctx: *mut ()) {
        critical_section::with(|cs| {
            self.callback.borrow(cs).set(Some((callback, ctx as usize)));
        });
    }

    fn set_alarm(&self, _alarm: AlarmHandle, timestamp: u64) -> bool {
        critical_section::with(|cs| {
            if timestamp <= self.now() {
                self.alarm_at.borrow(cs).set(u64::MAX);
                false
            } else {
                self.alarm_at.borrow(cs).set(timestamp);
                true
            }
        })
    }
}

embassy_time_driver::time_driver_impl!(static DRIVER: SysTickTimeDriver = SysTickTimeDriver::new());

/// SysTick interrupt handler
#[no_mangle]
extern "C" fn SysTick_Handler() {
    crate::ch32v203_hardware::clear_systick_flag();
    DRIVER.tick();
}

// Critical section implementation for single-core RISC-V
critical_section::set_impl!(RiscvCriticalSection);

struct RiscvCriticalSection;

unsafe impl critical_section::Impl for RiscvCriticalSection {
    unsafe fn acquire() -> u8 {
        let mut mstatus: usize;
        core::arch::asm!("csrrci {}, mstatus, 8", out(reg) mstatus);
        (mstatus & 8) as u8
    }

    unsafe fn release(was_active: u8) {
        if was_active != 0 {
            core::arch::asm!("csrsi mstatus, 8");
        }
    }
}
