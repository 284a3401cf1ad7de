pub mod auth_controller;
pub mod booking_controller;
pub mod combo_controller;
pub mod movie_controller;
pub mod payment_controller;
pub mod review_controller;
pub mod room_controller;
pub mod seat_controller;
pub mod showtime_controller;
pub mod theater_controller;
pub mod user_controller;
