fn main() {
    println!("{}", helloworld::greeting());
}
