//! Curated catalog of recommended models, served without network I/O.
//!
//! The list is maintained by hand and ships with the crate; entries carry
//! labeled download URLs rather than provider ids because several point at
//! multi-file repos or collections no search result maps onto.

use serde::Serialize;

/// One labeled download choice for a featured model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeaturedDownload {
    pub label: &'static str,
    pub url: &'static str,
}

/// One hand-picked catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeaturedModel {
    pub name: &'static str,
    /// Coarse grouping, currently `"image"` or `"video"`.
    pub category: &'static str,
    /// One-line guidance shown next to the entry.
    pub note: &'static str,
    pub architecture: &'static str,
    pub author: &'static str,
    /// Parameter scale, human-formatted (`"6B"`, `"5B, 14B"`).
    pub scale: &'static str,
    pub is_recommended: bool,
    pub downloads: &'static [FeaturedDownload],
}

/// Wire envelope for the featured catalog.
#[derive(Debug, Clone, Serialize)]
pub struct FeaturedEnvelope {
    pub success: bool,
    pub models: &'static [FeaturedModel],
}

/// The full catalog, in display order: recommended image models first, then
/// the rest of the image group, then video.
pub fn catalog() -> &'static [FeaturedModel] {
    &CATALOG
}

pub fn envelope() -> FeaturedEnvelope {
    FeaturedEnvelope {
        success: true,
        models: catalog(),
    }
}

const CATALOG: [FeaturedModel; 11] = [
    FeaturedModel {
        name: "Z-Image",
        category: "image",
        note: "Best for photoreal. Lightweight 6B with a fast Turbo variant.",
        architecture: "S3-DiT",
        author: "Tongyi MAI (Alibaba)",
        scale: "6B",
        is_recommended: true,
        downloads: &[
            FeaturedDownload {
                label: "Turbo FP8 (Recommended)",
                url: "https://huggingface.co/mcmonkey/swarm-models/blob/main/SwarmUI_Z-Image-Turbo-FP8Mix.safetensors",
            },
            FeaturedDownload {
                label: "Turbo BF16",
                url: "https://huggingface.co/Comfy-Org/z_image_turbo/blob/main/split_files/diffusion_models/z_image_turbo_bf16.safetensors",
            },
            FeaturedDownload {
                label: "Turbo GGUF",
                url: "https://huggingface.co/jayn7/Z-Image-Turbo-GGUF/tree/main",
            },
        ],
    },
    FeaturedModel {
        name: "Flux.2 Klein",
        category: "image",
        note: "Great for editing and art variety. Smaller, faster Flux.2 variant.",
        architecture: "MMDiT",
        author: "Black Forest Labs",
        scale: "4B, 9B",
        is_recommended: true,
        downloads: &[
            FeaturedDownload {
                label: "Klein 4B Distilled",
                url: "https://huggingface.co/Comfy-Org/flux2-klein-4B/tree/main/split_files/diffusion_models",
            },
            FeaturedDownload {
                label: "Klein 4B GGUF Q4",
                url: "https://huggingface.co/unsloth/FLUX.2-klein-4B-GGUF/blob/main/flux-2-klein-4b-Q4_K_M.gguf",
            },
            FeaturedDownload {
                label: "Klein 9B",
                url: "https://huggingface.co/black-forest-labs/FLUX.2-klein-9B/blob/main/flux-2-klein-9b.safetensors",
            },
        ],
    },
    FeaturedModel {
        name: "Flux.2 Dev",
        category: "image",
        note: "Smartest image model available. Massive 32B, needs 64GB+ RAM.",
        architecture: "MMDiT",
        author: "Black Forest Labs",
        scale: "32B",
        is_recommended: true,
        downloads: &[
            FeaturedDownload {
                label: "Dev FP8 (Recommended)",
                url: "https://huggingface.co/silveroxides/FLUX.2-dev-fp8_scaled/blob/main/flux2-dev-fp8mixedfromscaled.safetensors",
            },
            FeaturedDownload {
                label: "Dev GGUF",
                url: "https://huggingface.co/city96/FLUX.2-dev-gguf/tree/main",
            },
        ],
    },
    FeaturedModel {
        name: "Qwen Image",
        category: "image",
        note: "Great quality, very memory intense (30GB+ RAM). Slow but smart.",
        architecture: "MMDiT",
        author: "Alibaba-Qwen",
        scale: "20B",
        is_recommended: false,
        downloads: &[
            FeaturedDownload {
                label: "FP8/BF16 Variants",
                url: "https://huggingface.co/Comfy-Org/Qwen-Image_ComfyUI/tree/main/split_files/diffusion_models",
            },
            FeaturedDownload {
                label: "GGUF",
                url: "https://huggingface.co/city96/Qwen-Image-gguf/tree/main",
            },
        ],
    },
    FeaturedModel {
        name: "Flux.1",
        category: "image",
        note: "High quality, large ecosystem of finetunes and LoRAs. Outdated but still very popular.",
        architecture: "MMDiT",
        author: "Black Forest Labs",
        scale: "12B",
        is_recommended: false,
        downloads: &[
            FeaturedDownload {
                label: "Dev GGUF",
                url: "https://huggingface.co/city96/FLUX.1-dev-gguf/tree/main",
            },
            FeaturedDownload {
                label: "Dev FP8",
                url: "https://huggingface.co/Comfy-Org/flux1-dev/blob/main/flux1-dev-fp8.safetensors",
            },
            FeaturedDownload {
                label: "Schnell FP8",
                url: "https://huggingface.co/Comfy-Org/flux1-schnell/blob/main/flux1-schnell-fp8.safetensors",
            },
        ],
    },
    FeaturedModel {
        name: "Chroma",
        category: "image",
        note: "Flux derivative, uncensored. Decent quality, works best with long prompts.",
        architecture: "MMDiT",
        author: "Lodestone Rock",
        scale: "8.9B",
        is_recommended: false,
        downloads: &[
            FeaturedDownload {
                label: "HD FP8 Scaled",
                url: "https://huggingface.co/silveroxides/Chroma1-HD-fp8-scaled/tree/main",
            },
            FeaturedDownload {
                label: "GGUF",
                url: "https://huggingface.co/silveroxides/Chroma-GGUF",
            },
        ],
    },
    FeaturedModel {
        name: "SD 3.5 Large",
        category: "image",
        note: "Outdated but decent for its time. 8B MMDiT from Stability AI.",
        architecture: "MMDiT",
        author: "Stability AI",
        scale: "8B",
        is_recommended: false,
        downloads: &[
            FeaturedDownload {
                label: "GGUF",
                url: "https://huggingface.co/city96/stable-diffusion-3.5-large-gguf/tree/main",
            },
            FeaturedDownload {
                label: "Turbo GGUF",
                url: "https://huggingface.co/city96/stable-diffusion-3.5-large-turbo-gguf/tree/main",
            },
        ],
    },
    FeaturedModel {
        name: "Wan 2.1",
        category: "video",
        note: "Best local video model. 14B for quality, 1.3B for speed.",
        architecture: "DiT",
        author: "Alibaba - Wan-AI",
        scale: "1.3B, 5B, 14B",
        is_recommended: true,
        downloads: &[
            FeaturedDownload {
                label: "Comfy Repackaged (FP8/FP16)",
                url: "https://huggingface.co/Comfy-Org/Wan_2.1_ComfyUI_repackaged/tree/main/split_files/diffusion_models",
            },
            FeaturedDownload {
                label: "T2V 14B GGUF",
                url: "https://huggingface.co/city96/Wan2.1-T2V-14B-gguf/tree/main",
            },
            FeaturedDownload {
                label: "I2V 14B 480p GGUF",
                url: "https://huggingface.co/city96/Wan2.1-I2V-14B-480P-gguf/tree/main",
            },
        ],
    },
    FeaturedModel {
        name: "Wan 2.2",
        category: "video",
        note: "Better photorealism than 2.1 but more complex (high+low noise pair for 14B).",
        architecture: "DiT",
        author: "Alibaba - Wan-AI",
        scale: "5B, 14B",
        is_recommended: true,
        downloads: &[
            FeaturedDownload {
                label: "Comfy Repackaged",
                url: "https://huggingface.co/Comfy-Org/Wan_2.2_ComfyUI_Repackaged/tree/main/split_files/diffusion_models",
            },
            FeaturedDownload {
                label: "GGUF Collection",
                url: "https://huggingface.co/collections/QuantStack/wan22-ggufs-6887ec891bdea453a35b95f3",
            },
        ],
    },
    FeaturedModel {
        name: "Hunyuan Video",
        category: "video",
        note: "Decent quality T2V and I2V. GPU and memory intensive (12B).",
        architecture: "MMDiT",
        author: "Tencent",
        scale: "12B",
        is_recommended: false,
        downloads: &[
            FeaturedDownload {
                label: "T2V BF16",
                url: "https://huggingface.co/Comfy-Org/HunyuanVideo_repackaged/blob/main/split_files/diffusion_models/hunyuan_video_t2v_720p_bf16.safetensors",
            },
            FeaturedDownload {
                label: "GGUF (city96)",
                url: "https://huggingface.co/city96/HunyuanVideo-gguf/tree/main",
            },
        ],
    },
    FeaturedModel {
        name: "LTX Video",
        category: "video",
        note: "Very fast but lower quality. Popular for Image2Video workflows.",
        architecture: "DiT",
        author: "Lightricks",
        scale: "3B",
        is_recommended: false,
        downloads: &[FeaturedDownload {
            label: "All Versions",
            url: "https://huggingface.co/Lightricks/LTX-Video/tree/main",
        }],
    },
];
