// frontdesk - interaction controllers for a dental practice website
//
// The site is mostly static sections. The parts with real behaviour are
// modelled here as state machines that never touch a browser:
//
// Architecture:
// - Controllers: reveal-on-scroll, booking/contact wizard, testimonial
//   carousel, about-section count-up
// - Capabilities: viewport observer, scheduler, submitter, notification
//   sink. Controllers depend on these traits only; tests and the demo
//   plug in deterministic or simulated implementations
// - Config: env > ~/.config/frontdesk/config.toml > defaults
// - Demo: headless walkthrough of a visit, driven by real timers

pub mod config;
pub mod controllers;
pub mod demo;
pub mod form;
pub mod notify;
pub mod scheduler;
pub mod submit;
pub mod util;
pub mod viewport;
