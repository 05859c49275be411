pub mod itinerary;
pub mod payment;
pub mod trip;
pub mod voice;
