pub mod amortization;
pub mod flipping;
