//! 仿真核心模块
//!
//! 此模块包含离散事件仿真的核心组件：仿真时间、事件、事件队列、
//! 单次运行的引擎以及并行重复运行。

// 子模块声明
mod cancel;
mod engine;
mod event;
mod record;
mod replicate;
mod scheduler;
mod state;
mod time;

// 重新导出公共接口
pub use cancel::CancellationToken;
pub use engine::{Simulation, SimulationSettings};
pub use event::Event;
pub use record::{RejectionReason, ServedVisit, VisitOutcome, VisitRecord};
pub use replicate::run_replications;
pub use scheduler::EventQueue;
pub use state::VisitId;
pub use time::SimTime;
