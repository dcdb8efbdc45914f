//! In-memory tenant fakes for job tests.
