fn main() {
    seda::app::startup::startup();
}
