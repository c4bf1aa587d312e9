/// Greeting printed by the HelloWorld binary.
pub fn greeting() -> &'static str {
    "Hello from HelloWorld!"
}
