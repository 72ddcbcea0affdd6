mod kernels;
pub use kernels::{Kernel, KernelShape};

mod ops;
pub use ops::{close, dilate, erode, open, BorderMode};
