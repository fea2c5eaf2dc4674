use loadbench::error::AppResult;

fn main() -> AppResult<()> {
    loadbench::entry::run()
}
