mod admission;
mod assign;
pub mod route;

pub use admission::{
    allocate_alternate, allocate_fixed, Admission, AdmissionController, AdmissionState,
    Allocation, CallRequest,
};
pub use assign::{first_fit, global_first_fit, Assignment, WavelengthPolicy};
pub use route::{PathCandidate, PathEnumerator};
