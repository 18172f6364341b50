pub mod auth;
pub mod events;
pub mod ml;
pub mod registrations;

pub use auth::{login, signup, AuthResponse, LoginRequest, SignupRequest};
pub use events::{
    create_event,
    delete_event,
    get_event,
    list_events,
    update_event,
    CreateEventRequest,
    EventResponse,
    UpdateEventRequest,
};
pub use ml::{extract_skills, recommend_events, ExtractSkillsRequest, RecommendEventsRequest};
pub use registrations::{
    cancel_registration,
    my_registrations,
    register_for_event,
    RegisterRequest,
    RegistrationResponse,
};
