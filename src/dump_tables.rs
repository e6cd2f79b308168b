use rapid_xml_escape::table::{EscapeCode, CP1252_TABLE, UTF8_TABLE};

fn print_table(name: &str, table: &[EscapeCode; 256]) {
    println!("{}:", name);

    print!("            ");
    for i in 0..16 {
        print!(" {:2x}", i);
    }
    println!();

    for (row, codes) in table.chunks(16).enumerate() {
        print!("/*   {:02x}:  */", row * 16);
        for code in codes {
            print!("{:2},", code.to_raw());
        }
        println!();
    }
}

fn print_entities() {
    println!("entities:");

    for raw in 0..=u8::MAX {
        if let Some(EscapeCode::Entity(entity)) = EscapeCode::from_raw(raw) {
            println!("  {:2}  {:?}  {}", raw, entity, entity.as_str());
        }
    }
}

fn main() {
    print_table("CP1252", &CP1252_TABLE);
    println!();
    print_table("UTF-8", &UTF8_TABLE);
    println!();
    print_entities();
}
