// 滑动窗口限流
// 共享 Redis 存储不可用时回退到进程内存储

pub mod clock;
pub mod limiter;
pub mod policy;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use limiter::{Admission, AdmissionResult, Limiter, RateLimitInfo, Rejection};
pub use policy::{AUTHENTICATED, PREMIUM, PolicyTable, RateLimitPolicy, UNAUTHENTICATED};
pub use store::{BackendState, LocalRequestStore, RedisRequestStore, RequestStore, select_store};
