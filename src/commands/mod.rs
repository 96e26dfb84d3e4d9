pub mod flights;
pub mod health;
pub mod reference;

pub use flights::{
    FlightFields, handle_create_flight, handle_delete_flight, handle_edit_flight,
    handle_list_flights,
};
pub use health::handle_health;
pub use reference::{handle_list_airlines, handle_list_airports, handle_list_gates};
