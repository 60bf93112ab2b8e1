fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Compile federation.proto from the proto directory
    std::fs::create_dir_all("src/grpc/proto")?;
    tonic_prost_build::configure()
        .build_server(true)
        .build_client(true)
        .out_dir("src/grpc/proto")
        .compile_protos(&["proto/federation.proto"], &["proto"])?;
    Ok(())
}
