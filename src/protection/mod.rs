//! 보호장치(MCB/퓨즈) 정격 카탈로그와 Zs 한계값 테이블.

pub mod device;
pub mod zs_limits;

pub use device::*;
pub use zs_limits::*;
