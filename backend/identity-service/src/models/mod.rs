pub mod user;

pub use user::{LoginRequest, LoginResponse, NewUser, RegisterRequest, User, UserView};
