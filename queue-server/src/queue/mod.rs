//! 排队领域逻辑
//!
//! # 模块结构
//!
//! - [`engine`] - 取号 / 叫号 / 取消 / 完成 / 位置查询
//! - [`snapshot`] - 员工面板与公共总览的聚合读取
//!
//! 引擎只依赖 repository 层和配置，不触碰 HTTP；
//! api 层把结果翻译成响应信封并广播刷新事件。

pub mod engine;
pub mod snapshot;

pub use engine::{
    CallOutcome, CancelOutcome, FinishOutcome, IssueReceipt, TicketPosition, call_next,
    cancel_current, finish_by_code, format_code, issue_ticket, ticket_position,
};
pub use snapshot::{DashboardSnapshot, StoreOverview, dashboard, overview};
