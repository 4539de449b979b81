pub mod access;
pub mod auth;
pub mod health;
pub mod invitations;

#[cfg(test)]
mod tests;
