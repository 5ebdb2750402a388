pub mod auth;
pub mod enrollment;
pub mod payment;

// Re-export all the models that are used in other modules
pub use auth::{
    AuthResponse, AuthUser, LoginRequest, Profile, Role, Session, SignIn, UnknownRole, UserResponse,
};
pub use enrollment::{
    BusEnrollment, CreateEnrollmentRequest, CreateRouteRequest, RequestStatus, RouteRequest,
};
pub use payment::{
    Payment, PaymentFee, PaymentInvoice, PaymentStatus, PaymentType, RecordPaymentRequest,
};
