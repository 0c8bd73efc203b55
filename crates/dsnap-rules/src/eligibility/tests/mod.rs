mod combinator;
mod common;
