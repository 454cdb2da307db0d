pub mod serializers;
pub mod urls;
pub mod views;
