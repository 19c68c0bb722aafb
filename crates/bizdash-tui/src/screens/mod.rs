pub mod crud;
pub mod login;

pub use crud::CrudScreen;
pub use login::LoginScreen;
