fn main() {
    println!("Hello from HelloWorld!");
}
