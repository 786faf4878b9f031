pub mod euler;
pub mod rk4;

pub use euler::semi_implicit_euler_step;
pub use rk4::RK4;
