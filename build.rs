fn main() {
    // Propagate the ESP-IDF toolchain environment only when building for
    // the device; host builds (simulation, tests) need nothing here.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
