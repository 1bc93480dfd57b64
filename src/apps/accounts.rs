//! Users, registration and token endpoints

pub mod models;
pub mod serializers;
pub mod views;

#[cfg(test)]
mod tests {
	mod login_tests;
	mod signup_tests;
}
