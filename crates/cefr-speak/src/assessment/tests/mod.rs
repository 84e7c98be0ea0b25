mod common;
mod practice;
mod session;
