pub(crate) mod vrchat;
