#![no_main]

use std::cell::RefCell;
use std::rc::Rc;

use arbitrary::Arbitrary;
use framewatch_runtime::{
    CheckOutcome, DirtyCheck, FnCheck, FrameScheduler, SchedulerConfig, SubscriptionId, TrackError,
};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug, Clone, Copy)]
enum Behavior {
    Clean,
    Redraw,
    Fail,
    Detach,
}

#[derive(Arbitrary, Debug)]
enum Op {
    Subscribe(Behavior),
    Resubscribe(u8),
    Unsubscribe(u8),
    Tick,
    Stop,
    Start,
}

fuzz_target!(|ops: Vec<Op>| {
    let (sched, _clock) =
        FrameScheduler::manual(SchedulerConfig::default().with_slow_check_budget(None));
    let log: Rc<RefCell<Vec<u64>>> = Rc::new(RefCell::new(Vec::new()));
    let mut checks: Vec<(Rc<dyn DirtyCheck>, SubscriptionId)> = Vec::new();

    for op in ops.into_iter().take(256) {
        match op {
            Op::Subscribe(behavior) => {
                let sink = Rc::clone(&log);
                let check = Rc::new(FnCheck::new(move || {
                    sink.borrow_mut().push(0);
                    match behavior {
                        Behavior::Clean => Ok(CheckOutcome::Clean),
                        Behavior::Redraw => Ok(CheckOutcome::Redraw),
                        Behavior::Fail => Err(TrackError::private_member("#fuzz")),
                        Behavior::Detach => Ok(CheckOutcome::Detached),
                    }
                }));
                let check: Rc<dyn DirtyCheck> = check;
                let id = sched.subscribe(Rc::clone(&check));
                checks.push((check, id));
            }
            Op::Resubscribe(index) => {
                if let Some((check, _)) = checks.get(usize::from(index) % checks.len().max(1)) {
                    let before = sched.len();
                    let present = sched.unsubscribe_callback(check);
                    sched.subscribe(Rc::clone(check));
                    assert_eq!(sched.len(), if present { before } else { before + 1 });
                }
            }
            Op::Unsubscribe(index) => {
                if let Some((_, id)) = checks.get(usize::from(index) % checks.len().max(1)) {
                    sched.unsubscribe(*id);
                    assert!(!sched.contains(*id));
                }
            }
            Op::Tick => {
                let live = sched.len();
                log.borrow_mut().clear();
                let report = sched.tick();
                if report.swept {
                    assert_eq!(report.invoked, live);
                    assert_eq!(log.borrow().len(), live);
                    assert_eq!(sched.len(), live - report.detached - report.failures.len());
                } else {
                    assert!(log.borrow().is_empty());
                }
            }
            Op::Stop => sched.stop(),
            Op::Start => sched.start(),
        }
    }
});
