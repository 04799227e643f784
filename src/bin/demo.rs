//! Demonstration driver: obtains a backing region from the host allocator,
//! hands it to a `PoolArena`, and runs a short scripted workload.
//!
//! This binary is the out-of-core collaborator the library itself never
//! depends on — it stands in for whatever bare-metal startup code would
//! normally carve out a fixed region of memory before handing it to
//! `PoolArena::init`. Run with `RUST_LOG=debug` to see the allocator's
//! diagnostic dump.

use pool_arena::PoolArena;

fn main() {
    env_logger::init();

    let pool_size = 1024 * std::mem::size_of::<u32>();
    let mut region = vec![0u8; pool_size];

    let mut arena = PoolArena::init(region.as_mut_ptr(), region.len()).expect("arena init failed");

    let mut blocks: Vec<*mut u8> = Vec::new();
    for _ in 0..4 {
        let p = arena.alloc(4);
        if !p.is_null() && p != pool_arena::INVALID_PTR {
            blocks.push(p);
        }
    }

    println!("allocated {} blocks", blocks.len());
    for (i, p) in blocks.iter().enumerate() {
        println!("block[{i}] = {:p}, size = {}", p, arena.size_of(*p));
    }

    if let Some(&first) = blocks.first() {
        arena.free(first);
        println!("freed block[0]");
    }

    assert_eq!(arena.check(arena_in_use(&arena, &blocks)), 0);
    arena.log();
}

fn arena_in_use(arena: &PoolArena, blocks: &[*mut u8]) -> usize {
    blocks.iter().skip(1).map(|p| arena.size_of(*p)).sum()
}
