pub mod attendees;
pub mod certificate_sequences;
pub mod certificate_templates;
pub mod certificates;
pub mod events;
pub mod registrations;
pub mod rooms;
