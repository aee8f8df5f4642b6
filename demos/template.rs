use std::env;

use llmessage::template::TemplateParser;

pub fn main() {
    env_logger::init();

    let path = match env::args().nth(1) {
        Some(path) => path,
        None => {
            eprintln!("usage: template <message_template.msg>");
            return;
        }
    };

    let parser = match TemplateParser::from_file(&path) {
        Ok(parser) => parser,
        Err(err) => {
            eprintln!("cannot read {}: {}", path, err);
            return;
        }
    };

    println!("version {}", parser.version());
    for msg in parser.messages() {
        println!(
            "{:#010x} {} {:?} {:?} {:?}",
            msg.id(),
            msg.name(),
            msg.trust(),
            msg.encoding(),
            msg.deprecation()
        );
        for block in msg.blocks() {
            let size = block
                .total_size()
                .map_or_else(|| "variable".to_owned(), |size| size.to_string());
            println!("  {} {:?} ({} bytes)", block.name(), block.block_type(), size);
            for var in block.variables() {
                println!("    {} {}", var.name(), var.variable_type());
            }
        }
    }
}
